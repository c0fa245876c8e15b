mod helpers;

mod fault_test;
mod grants_test;
mod reconcile_test;
mod role_membership_test;
mod user_store_test;
