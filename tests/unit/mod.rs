/// Unit tests for the public domain API
mod fasting_cycle;
mod streak_properties;
