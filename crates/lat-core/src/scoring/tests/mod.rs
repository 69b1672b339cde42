use super::*;

mod properties;
