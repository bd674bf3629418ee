mod emergency_test;
mod helpers;
mod router_test;
