pub mod aggregate;
pub mod cost;
pub mod enhanced;
pub mod green_cover;
pub mod growth;
pub mod risk;
pub mod sequestration;
pub mod site;
