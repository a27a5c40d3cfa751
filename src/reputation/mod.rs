pub mod badges;
pub mod services;
