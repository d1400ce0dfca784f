pub mod question;
pub mod subject;
