use chrono::NaiveDate;
use mockall::mock;

use hort_core::models::permission::NewPermissionRequest;
use hort_core::models::registry::StudentOnboardingRequest;

use crate::models::{
    DbCheckoutEvent, DbCollector, DbGroup, DbPermission, DbPermissionView, DbStudentWithGroup,
};

// Mock repositories for testing
mock! {
    pub PermissionRepo {
        pub async fn create_permission(
            &self,
            request: NewPermissionRequest,
        ) -> eyre::Result<i64>;

        pub async fn list_permission_views(
            &self,
            active_only: bool,
        ) -> eyre::Result<Vec<DbPermissionView>>;

        pub async fn get_active_permissions_for_date(
            &self,
            student_id: i64,
            date: NaiveDate,
        ) -> eyre::Result<Vec<DbPermission>>;

        pub async fn deactivate_permission(&self, id: i64) -> eyre::Result<bool>;
    }
}

mock! {
    pub CheckoutRepo {
        pub async fn get_checkout_event(
            &self,
            student_id: i64,
            date: NaiveDate,
        ) -> eyre::Result<Option<DbCheckoutEvent>>;

        pub async fn insert_checkout_event(
            &self,
            student_id: i64,
            date: NaiveDate,
            method: &'static str,
            collector_id: Option<i64>,
            permission_id: Option<i64>,
            comment: Option<&'static str>,
        ) -> eyre::Result<Option<DbCheckoutEvent>>;
    }
}

mock! {
    pub StudentRepo {
        pub async fn search_students(
            &self,
            name: Option<&'static str>,
            group_id: Option<i64>,
        ) -> eyre::Result<Vec<DbStudentWithGroup>>;

        pub async fn get_active_collectors(
            &self,
            student_id: i64,
        ) -> eyre::Result<Vec<DbCollector>>;

        pub async fn create_student_with_collectors(
            &self,
            request: StudentOnboardingRequest,
        ) -> eyre::Result<DbStudentWithGroup>;
    }
}

mock! {
    pub GroupRepo {
        pub async fn list_groups(&self) -> eyre::Result<Vec<DbGroup>>;

        pub async fn get_group_by_id(&self, id: i64) -> eyre::Result<Option<DbGroup>>;
    }
}
