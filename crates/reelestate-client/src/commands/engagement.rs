use reelestate_shared::ItemId;

use crate::engagement::EngagementStatus;
use crate::state::AppState;

pub fn toggle_like(state: &AppState, id: String) -> Result<EngagementStatus, String> {
    let mut engagement = state
        .engagement
        .lock()
        .map_err(|e| format!("Lock poisoned: {e}"))?;
    let id = ItemId(id);
    engagement.toggle_like(&id);
    Ok(engagement.status(&id))
}

pub fn toggle_save(state: &AppState, id: String) -> Result<EngagementStatus, String> {
    let mut engagement = state
        .engagement
        .lock()
        .map_err(|e| format!("Lock poisoned: {e}"))?;
    let id = ItemId(id);
    engagement.toggle_save(&id);
    Ok(engagement.status(&id))
}

pub fn get_engagement(state: &AppState, id: String) -> Result<EngagementStatus, String> {
    let engagement = state
        .engagement
        .lock()
        .map_err(|e| format!("Lock poisoned: {e}"))?;
    Ok(engagement.status(&ItemId(id)))
}

pub fn list_saved(state: &AppState) -> Result<Vec<ItemId>, String> {
    let engagement = state
        .engagement
        .lock()
        .map_err(|e| format!("Lock poisoned: {e}"))?;
    Ok(engagement.saved_ids())
}
