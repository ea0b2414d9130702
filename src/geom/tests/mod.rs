mod test_projection_basic;
