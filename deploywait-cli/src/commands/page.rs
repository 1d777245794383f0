use crate::output;
use anyhow::Result;
use deploywait_common::{http_client, PageCheck};
use std::time::Duration;

pub async fn handle_check_wordpress(host: &str, timeout_secs: u64) -> Result<()> {
    let check = PageCheck::wordpress(host).with_timeout(Duration::from_secs(timeout_secs));
    run_check(&check).await
}

pub async fn handle_check_page(url: &str, expect: &str, timeout_secs: u64, interval_secs: u64) -> Result<()> {
    let check = PageCheck::new(url, expect)
        .with_timeout(Duration::from_secs(timeout_secs))
        .with_interval(Duration::from_secs(interval_secs));
    run_check(&check).await
}

async fn run_check(check: &PageCheck) -> Result<()> {
    let client = http_client()?;

    let spinner = output::spinner(format!("Waiting for {}...", check.url));
    let result = check.wait(&client).await;
    spinner.finish_and_clear();

    result?;
    output::print_success(&format!("{} is up", check.url));
    Ok(())
}
