//! Single authorization policy consulted by every operation, instead of role
//! checks scattered across handlers.

use despacho_errors::{DispatchError, DispatchResult};

use crate::value_objects::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ManageHubs,
    ManageBindings,
    ViewQueue,
    DispatchProfessional,
    MoveToBack,
    RemoveFromQueue,
    EnterQueue,
    LeaveQueue,
    ViewOwnStatus,
    DrainNotifications,
    ViewReports,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::ManageHubs => "manage_hubs",
            Action::ManageBindings => "manage_bindings",
            Action::ViewQueue => "view_queue",
            Action::DispatchProfessional => "dispatch_professional",
            Action::MoveToBack => "move_to_back",
            Action::RemoveFromQueue => "remove_from_queue",
            Action::EnterQueue => "enter_queue",
            Action::LeaveQueue => "leave_queue",
            Action::ViewOwnStatus => "view_own_status",
            Action::DrainNotifications => "drain_notifications",
            Action::ViewReports => "view_reports",
        }
    }
}

pub fn authorize(role: Role, action: Action) -> bool {
    match action {
        Action::ManageHubs
        | Action::ManageBindings
        | Action::ViewQueue
        | Action::DispatchProfessional
        | Action::MoveToBack
        | Action::RemoveFromQueue => matches!(role, Role::Admin),
        Action::EnterQueue
        | Action::LeaveQueue
        | Action::ViewOwnStatus
        | Action::DrainNotifications => matches!(role, Role::Professional),
        Action::ViewReports => true,
    }
}

pub fn ensure(role: Role, action: Action) -> DispatchResult<()> {
    if authorize(role, action) {
        Ok(())
    } else {
        Err(DispatchError::permission_denied(action.as_str()))
    }
}
