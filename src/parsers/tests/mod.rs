mod text_field_tests;
