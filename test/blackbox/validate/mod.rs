mod validate_integration_test;
