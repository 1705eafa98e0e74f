//! tests/mod.rs
//! Pruebas del servicio de mantenimiento.

mod support;

mod service_tests;
