//! In-memory integration tests for account flows.

use super::helpers::{Platform, platform};
use chrono::Duration;
use eyre::{OptionExt, WrapErr};
use rstest::rstest;
use trellis::{error::ErrorKind, identity::ports::UserRepository};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn new_user_reaches_an_active_project(platform: eyre::Result<Platform>) -> eyre::Result<()> {
    let platform = platform?;
    let user = platform
        .accounts
        .register("Priya", "Priya@Example.com", "s3cret")
        .await?;
    let email = user.email().clone();

    let unverified = platform
        .accounts
        .authenticate("priya@example.com", "s3cret")
        .await?;
    eyre::ensure!(!unverified.verified, "fresh account must be unverified");
    eyre::ensure!(
        !unverified.has_active_project,
        "fresh account has no projects"
    );

    let code = platform
        .mailer
        .last_code_for(&email)
        .ok_or_eyre("code mailed on registration")?;
    platform.accounts.verify(&email, code.as_str()).await?;
    let project = platform
        .memberships
        .create_project(&email, "Orbit")
        .await
        .wrap_err("create first project")?;

    let profile = platform
        .accounts
        .authenticate("PRIYA@example.com", "s3cret")
        .await?;
    eyre::ensure!(profile.verified, "verified flag persisted");
    eyre::ensure!(profile.has_active_project, "owner membership is active");
    eyre::ensure!(
        profile.last_project == Some(project.id),
        "created project becomes the last visited"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn code_expires_after_its_lifetime(platform: eyre::Result<Platform>) -> eyre::Result<()> {
    let platform = platform?;
    let user = platform
        .accounts
        .register("Quinn", "quinn@example.com", "pw")
        .await?;
    let email = user.email().clone();
    let stale = platform
        .mailer
        .last_code_for(&email)
        .ok_or_eyre("code mailed")?;

    platform
        .clock
        .advance(Duration::minutes(15) + Duration::seconds(1));
    let rejected = platform
        .accounts
        .verify(&email, stale.as_str())
        .await
        .err()
        .ok_or_eyre("expired code must be rejected")?;
    eyre::ensure!(rejected.kind() == ErrorKind::InvalidCode, "got {rejected}");

    platform.accounts.resend_code(&email).await?;
    let fresh = platform
        .mailer
        .last_code_for(&email)
        .ok_or_eyre("fresh code mailed")?;
    let verified = platform.accounts.verify(&email, fresh.as_str()).await?;
    eyre::ensure!(verified.is_verified(), "fresh code verifies");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn email_is_unique_across_case(platform: eyre::Result<Platform>) -> eyre::Result<()> {
    let platform = platform?;
    platform.signed_up("Rosa", "rosa@example.com").await?;

    let err = platform
        .accounts
        .register("Impostor", "ROSA@EXAMPLE.COM", "pw")
        .await
        .err()
        .ok_or_eyre("duplicate registration must fail")?;
    eyre::ensure!(err.kind() == ErrorKind::Conflict, "got {err}");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn verification_and_project_creation_do_not_overwrite_each_other(
    platform: eyre::Result<Platform>,
) -> eyre::Result<()> {
    let platform = platform?;
    for round in 0..25 {
        let address = format!("racer{round}@example.com");
        let user = platform
            .accounts
            .register("Racer", &address, "s3cret")
            .await?;
        let email = user.email().clone();
        let code = platform
            .mailer
            .last_code_for(&email)
            .ok_or_eyre("code mailed on registration")?;

        let (verified, created) = tokio::join!(
            platform.accounts.verify(&email, code.as_str()),
            platform.memberships.create_project(&email, "Relay"),
        );
        verified.wrap_err("verify during project creation")?;
        let project = created.wrap_err("create project during verification")?;

        let stored = platform
            .store
            .find_user(&email)
            .await?
            .ok_or_eyre("user still stored")?;
        eyre::ensure!(stored.is_verified(), "round {round}: verified flag lost");
        eyre::ensure!(
            stored.last_project() == Some(project.id),
            "round {round}: last-visited project lost"
        );
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn profile_updates_write_only_their_own_column(
    platform: eyre::Result<Platform>,
) -> eyre::Result<()> {
    let platform = platform?;
    let user = platform
        .accounts
        .register("Quinn", "quinn@example.com", "s3cret")
        .await?;
    let email = user.email().clone();
    let stale = platform
        .store
        .find_user(&email)
        .await?
        .ok_or_eyre("user stored")?;

    let project = platform.memberships.create_project(&email, "Ledger").await?;
    let code = platform
        .mailer
        .last_code_for(&email)
        .ok_or_eyre("code mailed on registration")?;
    platform.accounts.verify(&email, code.as_str()).await?;
    platform
        .accounts
        .update_display_name(&email, "Quinn Q")
        .await?;
    platform
        .accounts
        .change_password(&email, "s3cret", "n3w-s3cret")
        .await?;

    let stored = platform
        .store
        .find_user(&email)
        .await?
        .ok_or_eyre("user stored")?;
    eyre::ensure!(!stale.is_verified(), "snapshot predates verification");
    eyre::ensure!(stored.is_verified(), "verified flag kept");
    eyre::ensure!(
        stored.last_project() == Some(project.id),
        "last-visited project kept"
    );
    eyre::ensure!(
        stored.display_name().as_str() == "Quinn Q",
        "display name replaced"
    );
    eyre::ensure!(
        stored.credential_hash() != stale.credential_hash(),
        "credential replaced"
    );
    Ok(())
}
