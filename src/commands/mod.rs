pub mod create;
pub mod doctor;
