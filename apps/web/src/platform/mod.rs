pub mod animation;
pub mod backend;
pub mod facade;
pub mod jobs;
pub mod provinces;
pub mod registration;
