pub mod driver;
pub mod corpus;
