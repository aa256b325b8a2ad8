//! Group session command handlers.

use std::sync::Arc;

use tabled::Tabled;

use slotbook_core::{
    Command as CoreCommand, CommandResult, Controller, CreateGroupSessionRequest, GroupSession,
    GroupSessionPatch,
};

use crate::cli::{GlobalOpts, GroupsArgs, GroupsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct GroupRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "When")]
    when: String,
    #[tabled(rename = "Call")]
    call_type: String,
    #[tabled(rename = "Price")]
    price: u64,
    #[tabled(rename = "Seats")]
    seats: String,
    #[tabled(rename = "Status")]
    status: String,
}

fn row(s: &Arc<GroupSession>, color: bool) -> GroupRow {
    GroupRow {
        id: s.id.to_string(),
        title: s.title.clone(),
        when: s.scheduled_at.format("%Y-%m-%d %H:%M").to_string(),
        call_type: s.call_type.to_string(),
        price: s.price,
        seats: format!("{}/{}", s.booked_count(), s.capacity),
        status: output::paint_status(&s.status.to_string(), color),
    }
}

fn detail(s: &GroupSession) -> String {
    [
        format!("ID:          {}", s.id),
        format!("Title:       {}", s.title),
        format!("Provider:    {}", s.provider),
        format!("Category:    {}", s.category),
        format!("Starts:      {}", s.scheduled_at.to_rfc3339()),
        format!("Call:        {}", s.call_type),
        format!("Price:       {}", s.price),
        format!("Seats:       {} of {} taken", s.booked_count(), s.capacity),
        format!("Status:      {}", s.status),
        format!("Join link:   {}", s.join_link.as_deref().unwrap_or("-")),
        format!("Description: {}", s.description),
    ]
    .join("\n")
}

fn print_session(result: CommandResult, global: &GlobalOpts) -> Result<(), CliError> {
    match result {
        CommandResult::GroupSession(session) => {
            let out = output::render_single(&global.output, session.as_ref(), detail, |s| {
                s.id.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
        other => Err(CliError::Internal {
            message: format!("unexpected command result: {other:?}"),
        }),
    }
}

pub async fn handle(
    controller: &Controller,
    args: GroupsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        GroupsCommand::Create {
            provider,
            category,
            title,
            description,
            call_type,
            price,
            capacity,
            at,
            join_link,
        } => {
            let req = CreateGroupSessionRequest {
                provider: util::id(&provider, "provider")?,
                category: util::id(&category, "category")?,
                title,
                description,
                call_type: util::call_type(call_type),
                price,
                capacity,
                scheduled_at: util::datetime(&at, "at")?,
                join_link,
            };
            let result = controller
                .execute(CoreCommand::CreateGroupSession(req))
                .await?;
            print_session(result, global)
        }

        GroupsCommand::List { provider } => {
            let sessions = controller.group_sessions_for(&util::id(&provider, "provider")?);
            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                &sessions,
                |s| row(s, color),
                |s| s.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        GroupsCommand::Update {
            session,
            title,
            description,
            price,
            capacity,
            at,
            join_link,
            status,
        } => {
            let patch = GroupSessionPatch {
                title,
                description,
                price,
                capacity,
                scheduled_at: at.map(|raw| util::datetime(&raw, "at")).transpose()?,
                join_link,
                status: status.map(util::group_status),
            };
            let result = controller
                .execute(CoreCommand::UpdateGroupSession {
                    session: util::id(&session, "session")?,
                    patch,
                })
                .await?;
            print_session(result, global)
        }

        GroupsCommand::Delete { session } => {
            let id = util::id(&session, "session")?;
            if !util::confirm(
                &format!("Delete group session {id}? Seats of a scheduled session are refunded."),
                "groups delete",
                global.yes,
            )? {
                return Ok(());
            }
            let result = controller
                .execute(CoreCommand::DeleteGroupSession { session: id })
                .await?;
            if let CommandResult::GroupSessionDeleted { refunded, .. } = result {
                let msg = if refunded > 0 {
                    format!("Group session deleted; {refunded} refunded")
                } else {
                    "Group session deleted".to_owned()
                };
                output::notice(&msg, global.quiet);
            }
            Ok(())
        }
    }
}
