mod common_steps;
