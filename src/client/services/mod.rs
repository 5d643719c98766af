pub mod api_client;
pub mod city_service;
pub mod experience_service;
pub mod industry_service;
pub mod overview_service;
pub mod position_service;
pub mod q1_service;
pub mod salary_service;
