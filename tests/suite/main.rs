//! Integration tests for symblock-contract.

mod layout_tests;
mod schedule_tests;
mod contract_tests;
mod property_tests;
