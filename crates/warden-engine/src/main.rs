//! warden-check
//!
//! Loads an access config, compiles every list and field declaration, and
//! logs the resulting tables. Exits non-zero on any configuration fault.
//! `!resolver` names are bound to stand-ins (see [`warden_engine::check`]).

use std::process::ExitCode;

use tracing_subscriber::{fmt, EnvFilter};

use warden_engine::check::check_file;

fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "warden.yaml".to_string());

    let control = match check_file(&path) {
        Ok(control) => control,
        Err(e) => {
            tracing::error!(%path, code = %e.code(), fault = ?e.fault(), "{e}");
            return ExitCode::FAILURE;
        }
    };

    for list_key in control.list_keys() {
        let Some(list) = control.list(list_key) else { continue };
        for (schema, op, rule) in list.access.iter() {
            tracing::info!(list = %list_key, %schema, %op, %rule, "list access");
        }
        let mut field_keys: Vec<&String> = list.fields.keys().collect();
        field_keys.sort();
        for field_key in field_keys {
            let Some(field) = list.fields.get(field_key) else { continue };
            for (schema, op, rule) in field.iter() {
                tracing::info!(list = %list_key, field = %field_key, %schema, %op, %rule, "field access");
            }
        }
    }

    tracing::info!(%path, schemas = ?control.schema_names(), "access config ok");
    ExitCode::SUCCESS
}
