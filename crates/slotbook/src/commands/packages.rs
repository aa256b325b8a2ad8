//! Session package command handlers.

use std::sync::Arc;

use tabled::Tabled;

use slotbook_core::{
    Command as CoreCommand, CommandResult, Controller, CreatePackageRequest, Package, PackagePatch,
};

use crate::cli::{GlobalOpts, PackagesArgs, PackagesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct PackageRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Consumer")]
    consumer: String,
    #[tabled(rename = "Provider")]
    provider: String,
    #[tabled(rename = "Call")]
    call_type: String,
    #[tabled(rename = "Sessions")]
    sessions: String,
    #[tabled(rename = "Price")]
    price: u64,
    #[tabled(rename = "Status")]
    status: String,
}

fn row(p: &Arc<Package>, color: bool) -> PackageRow {
    PackageRow {
        id: p.id.to_string(),
        consumer: p.consumer.to_string(),
        provider: p.provider.to_string(),
        call_type: p.call_type.to_string(),
        sessions: format!("{}/{}", p.remaining_sessions, p.total_sessions),
        price: p.price,
        status: output::paint_status(&p.status.to_string(), color),
    }
}

fn detail(p: &Package) -> String {
    [
        format!("ID:         {}", p.id),
        format!("Consumer:   {}", p.consumer),
        format!("Provider:   {}", p.provider),
        format!("Category:   {}", p.category),
        format!("Call:       {}", p.call_type),
        format!("Sessions:   {} of {} left", p.remaining_sessions, p.total_sessions),
        format!("Price:      {} ({} per session)", p.price, p.per_session_price()),
        format!("Status:     {}", p.status),
        format!("Created:    {}", p.created_at.to_rfc3339()),
    ]
    .join("\n")
}

fn print_package(result: CommandResult, global: &GlobalOpts) -> Result<(), CliError> {
    match result {
        CommandResult::Package(package) => {
            let out = output::render_single(&global.output, package.as_ref(), detail, |p| {
                p.id.to_string()
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
    args: PackagesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        PackagesCommand::Create {
            consumer,
            provider,
            category,
            call_type,
            sessions,
            price,
        } => {
            let req = CreatePackageRequest {
                consumer: util::id(&consumer, "consumer")?,
                provider: util::id(&provider, "provider")?,
                category: util::id(&category, "category")?,
                call_type: util::call_type(call_type),
                total_sessions: sessions,
                price,
            };
            let result = controller.execute(CoreCommand::CreatePackage(req)).await?;
            print_package(result, global)
        }

        PackagesCommand::List { consumer, provider } => {
            let packages = match (consumer, provider) {
                (Some(c), _) => controller.packages_for_consumer(&util::id(&c, "consumer")?),
                (None, Some(p)) => controller.packages_for_provider(&util::id(&p, "provider")?),
                (None, None) => {
                    return Err(CliError::Validation {
                        field: "consumer".into(),
                        reason: "pass --consumer or --provider".into(),
                    });
                }
            };
            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                &packages,
                |p| row(p, color),
                |p| p.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PackagesCommand::Use { package } => {
            let result = controller
                .execute(CoreCommand::UsePackage {
                    package: util::id(&package, "package")?,
                })
                .await?;
            print_package(result, global)
        }

        PackagesCommand::Update {
            package,
            total,
            remaining,
            price,
            call_type,
        } => {
            let patch = PackagePatch {
                total_sessions: total,
                remaining_sessions: remaining,
                price,
                call_type: call_type.map(util::call_type),
            };
            if patch.is_empty() {
                return Err(CliError::Validation {
                    field: "package".into(),
                    reason: "nothing to update".into(),
                });
            }
            let result = controller
                .execute(CoreCommand::UpdatePackage {
                    package: util::id(&package, "package")?,
                    patch,
                })
                .await?;
            print_package(result, global)
        }

        PackagesCommand::Delete { package } => {
            let id = util::id(&package, "package")?;
            if !util::confirm(&format!("Delete package {id}?"), "packages delete", global.yes)? {
                return Ok(());
            }
            controller
                .execute(CoreCommand::DeletePackage { package: id })
                .await?;
            output::notice("Package deleted", global.quiet);
            Ok(())
        }
    }
}
