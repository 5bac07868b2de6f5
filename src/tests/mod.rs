mod api_tests;
mod expr_tests;
mod property_tests;
mod simplification_tests;
mod transform_tests;
