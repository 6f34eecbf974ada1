pub mod care_staff;
pub mod commission_rate;
pub mod customer;
pub mod service_record;
