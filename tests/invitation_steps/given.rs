//! Given steps for project invitation BDD scenarios.

use super::world::{InvitationWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use trellis::{identity::domain::Email, membership::domain::ProjectRole};

#[given(r#"a registered user "{address}" named "{name}""#)]
fn registered_user(
    world: &mut InvitationWorld,
    address: String,
    name: String,
) -> Result<(), eyre::Report> {
    world.register(&address, &name)
}

#[given(r#""{owner}" has created the project "{name}""#)]
fn project_created(
    world: &mut InvitationWorld,
    owner: String,
    name: String,
) -> Result<(), eyre::Report> {
    let owner_email = Email::new(owner)?;
    let project = run_async(world.service.create_project(&owner_email, &name))
        .wrap_err("create scenario project")?;
    world.project_id = Some(project.id);
    world.owner = Some(owner_email);
    Ok(())
}

#[given(r#""{member}" has joined the project as "{role}""#)]
fn member_joined(
    world: &mut InvitationWorld,
    member: String,
    role: String,
) -> Result<(), eyre::Report> {
    let project_id = world.project()?;
    let owner = world
        .owner
        .clone()
        .ok_or_else(|| eyre::eyre!("missing project owner in scenario world"))?;
    let member_email = Email::new(member)?;
    let granted = ProjectRole::try_from(role.as_str())
        .map_err(|err| eyre::eyre!("invalid role in scenario: {err}"))?;

    run_async(
        world
            .service
            .invite_member(project_id, &owner, &member_email, Some(granted)),
    )
    .wrap_err("invite scenario member")?;
    let invite = world
        .mailer
        .last_invite_for(&member_email)
        .ok_or_else(|| eyre::eyre!("missing invitation mail"))?;
    run_async(world.service.accept_invite(invite.token.as_str()))
        .wrap_err("accept scenario invitation")?;
    Ok(())
}
