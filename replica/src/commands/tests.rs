use super::*;

fn no_prompt() -> Result<String, String> {
    panic!("prompt should not be called")
}

#[test]
fn test_anonymous_without_username() {
    assert_eq!(
        resolve_credentials(None, None, no_prompt).unwrap(),
        Credentials::anonymous()
    );
}

#[test]
fn test_basic_with_both_values() {
    assert_eq!(
        resolve_credentials(Some("admin"), Some("secret"), no_prompt).unwrap(),
        Credentials::basic("admin", "secret")
    );
}

#[test]
fn test_prompts_for_missing_password() {
    let creds = resolve_credentials(Some("admin"), None, || Ok("typed".to_string())).unwrap();
    assert_eq!(creds, Credentials::basic("admin", "typed"));
}

#[test]
fn test_prompt_failure_is_reported() {
    let err = resolve_credentials(Some("admin"), None, || Err("no tty".to_string())).unwrap_err();
    assert_eq!(err, "no tty");
}

#[test]
fn test_password_without_username_is_rejected() {
    assert!(resolve_credentials(None, Some("secret"), no_prompt).is_err());
}
