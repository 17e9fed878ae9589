use uuid::Uuid;

use crate::domain::value_objects::enums::user_roles::UserRole;

/// Operations gated by the single authorization policy. Every use case
/// consults `can_act` instead of doing its own role/ownership checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentAction {
    View,
    Cancel,
    Review,
    CreatePaymentOrder,
    VerifyPayment,
    CreateRoom,
    IssueToken,
    SetCallStatus,
    OverrideStatus,
}

/// Uniform authorization policy over role + ownership.
///
/// Admins bypass ownership for every operation except Cancel and Review,
/// which stay owner-only: cancellation and reviews speak for the client, not
/// for the operator.
pub fn can_act(
    role: UserRole,
    owner_id: Uuid,
    acting_user_id: Uuid,
    action: AppointmentAction,
) -> bool {
    let is_owner = owner_id == acting_user_id;

    match action {
        AppointmentAction::Cancel | AppointmentAction::Review => is_owner,
        AppointmentAction::OverrideStatus => role.is_admin(),
        AppointmentAction::View
        | AppointmentAction::CreatePaymentOrder
        | AppointmentAction::VerifyPayment
        | AppointmentAction::CreateRoom
        | AppointmentAction::IssueToken
        | AppointmentAction::SetCallStatus => is_owner || role.is_admin(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_can_do_everything_but_override() {
        let owner = Uuid::new_v4();

        for action in [
            AppointmentAction::View,
            AppointmentAction::Cancel,
            AppointmentAction::Review,
            AppointmentAction::CreatePaymentOrder,
            AppointmentAction::VerifyPayment,
            AppointmentAction::CreateRoom,
            AppointmentAction::IssueToken,
            AppointmentAction::SetCallStatus,
        ] {
            assert!(can_act(UserRole::Client, owner, owner, action));
        }

        assert!(!can_act(
            UserRole::Client,
            owner,
            owner,
            AppointmentAction::OverrideStatus
        ));
    }

    #[test]
    fn admin_bypasses_ownership_except_cancel_and_review() {
        let owner = Uuid::new_v4();
        let admin = Uuid::new_v4();

        assert!(can_act(UserRole::Admin, owner, admin, AppointmentAction::View));
        assert!(can_act(
            UserRole::Admin,
            owner,
            admin,
            AppointmentAction::CreateRoom
        ));
        assert!(can_act(
            UserRole::Admin,
            owner,
            admin,
            AppointmentAction::IssueToken
        ));
        assert!(can_act(
            UserRole::Admin,
            owner,
            admin,
            AppointmentAction::OverrideStatus
        ));

        assert!(!can_act(
            UserRole::Admin,
            owner,
            admin,
            AppointmentAction::Cancel
        ));
        assert!(!can_act(
            UserRole::Admin,
            owner,
            admin,
            AppointmentAction::Review
        ));
    }

    #[test]
    fn stranger_is_denied() {
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        assert!(!can_act(
            UserRole::Client,
            owner,
            stranger,
            AppointmentAction::View
        ));
        assert!(!can_act(
            UserRole::Client,
            owner,
            stranger,
            AppointmentAction::Cancel
        ));
        assert!(!can_act(
            UserRole::Client,
            owner,
            stranger,
            AppointmentAction::IssueToken
        ));
    }
}
