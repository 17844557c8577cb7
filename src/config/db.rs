use colored::Colorize;
use std::time::Duration;

use super::env::Env;
use crate::services::bundle_store::SupabaseStore;

/// Returns `None` when no Supabase credentials are configured or the store
/// cannot be built from them. Analysis runs either way.
pub fn connect_store(env: &Env) -> Option<SupabaseStore> {
    let Some(supabase) = &env.supabase else {
        println!("{} Supabase not configured, bundle persistence disabled", "ℹ".blue());
        return None;
    };

    match SupabaseStore::new(
        &supabase.url,
        &supabase.key,
        Duration::from_millis(env.request_timeout_ms),
    ) {
        Ok(store) => {
            println!("{} Supabase ready ({})", "✓".green(), store.host());
            Some(store)
        }
        Err(e) => {
            tracing::warn!(error = %e, "bundle store setup failed");
            println!("{} Supabase unusable ({}), bundle persistence disabled", "⚠".yellow(), e);
            None
        }
    }
}
