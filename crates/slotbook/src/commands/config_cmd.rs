//! Config subcommand handlers.

use dialoguer::Password;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking the room-service token.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref state) = cfg.state_file {
        let _ = writeln!(out, "state_file = \"{}\"", state.display());
        let _ = writeln!(out);
    }
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);

    let w = &cfg.workflow;
    let _ = writeln!(out);
    let _ = writeln!(out, "[workflow]");
    let _ = writeln!(out, "provider_share_percent = {}", w.provider_share_percent);
    let _ = writeln!(
        out,
        "provisioning_timeout_secs = {}",
        w.provisioning_timeout_secs
    );
    let _ = writeln!(out, "chat_base_url = \"{}\"", w.chat_base_url);
    let _ = writeln!(out, "chat_room_id_len = {}", w.chat_room_id_len);

    if let Some(ref r) = cfg.rooms {
        let _ = writeln!(out);
        let _ = writeln!(out, "[rooms]");
        let _ = writeln!(out, "base_url = \"{}\"", r.base_url);
        if r.token.is_some() {
            let _ = writeln!(out, "token = \"****\"");
        }
        if let Some(ref env) = r.token_env {
            let _ = writeln!(out, "token_env = \"{env}\"");
        }
        if let Some(ref ca) = r.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(timeout) = r.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        for (kind, t) in [("audio", &r.audio), ("video", &r.video)] {
            let _ = writeln!(out);
            let _ = writeln!(out, "[rooms.{kind}]");
            let _ = writeln!(out, "template_id = \"{}\"", t.template_id);
            let _ = writeln!(out, "subdomain = \"{}\"", t.subdomain);
        }
    }

    out
}

fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let cfg = config::load(global)?;
            output::print_output(format_config_redacted(&cfg).trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            let cfg = config::load(global)?;
            let config_path = config::active_config_path(global);
            let state_path = config::state_path(global, &cfg);
            output::print_output(
                &format!(
                    "config: {}\nstate:  {}",
                    config_path.display(),
                    state_path.display()
                ),
                global.quiet,
            );
            Ok(())
        }

        ConfigCommand::Init { force } => {
            let path = config::active_config_path(global);
            if path.exists() && !force {
                return Err(CliError::Validation {
                    field: "config".into(),
                    reason: format!("{} already exists (pass --force to overwrite)", path.display()),
                });
            }
            config::save_config(&Config::default(), &path)?;
            output::notice(&format!("Wrote {}", path.display()), global.quiet);
            Ok(())
        }

        ConfigCommand::SetToken { token } => {
            let token = match token {
                Some(t) => t,
                None => Password::new()
                    .with_prompt("Room-service token")
                    .interact()
                    .map_err(prompt_err)?,
            };
            if token.trim().is_empty() {
                return Err(CliError::Validation {
                    field: "token".into(),
                    reason: "token cannot be empty".into(),
                });
            }
            slotbook_config::store_room_token(token.trim())?;
            output::notice("Token stored in system keyring", global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use slotbook_config::{RoomsSection, TemplateSection};

    use super::*;

    #[test]
    fn redacted_config_masks_the_token() {
        let cfg = Config {
            rooms: Some(RoomsSection {
                base_url: "https://rooms.test/".into(),
                token: Some("s3cret".into()),
                token_env: None,
                ca_cert: None,
                timeout: None,
                audio: TemplateSection {
                    template_id: "tpl-a".into(),
                    subdomain: "acme".into(),
                },
                video: TemplateSection {
                    template_id: "tpl-v".into(),
                    subdomain: "acme".into(),
                },
            }),
            ..Config::default()
        };
        let out = format_config_redacted(&cfg);
        assert!(out.contains("token = \"****\""));
        assert!(!out.contains("s3cret"));
        assert!(out.contains("[rooms.video]"));
    }
}
