//! Deletes tags from a destination registry with a one-shot deletion job.
//!
//! Run with: cargo run --example delete_tags -- <url> <namespace/repo> [tags...]

use libreplica::{Credentials, DeletionTarget, DialectKind, Job, JobState, Replicator};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let (Some(url), Some(repository)) = (args.next(), args.next()) else {
        eprintln!("usage: delete_tags <url> <namespace/repo> [tags...]");
        return Ok(());
    };
    let tags: Vec<String> = args.collect();

    let credentials = match (std::env::var("REGISTRY_USER"), std::env::var("REGISTRY_PASSWORD")) {
        (Ok(user), Ok(password)) => Credentials::basic(user, password),
        _ => Credentials::anonymous(),
    };

    let replicator = Replicator::builder().build()?;
    let mut job = replicator.deletion_job(
        DialectKind::Standard,
        DeletionTarget {
            repository,
            tags,
            destination: url,
            credentials,
            insecure: false,
        },
    )?;

    match job.enter().await? {
        JobState::Retrying => println!("Destination unreachable, try again later"),
        state => {
            let report = job.report();
            println!("Job {}", state);
            for deleted in &report.deleted {
                println!("  deleted: {}", deleted);
            }
            for missing in &report.missing {
                println!("  already absent: {}", missing);
            }
        }
    }
    job.exit().await?;

    Ok(())
}
