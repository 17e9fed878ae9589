pub mod room_teardown;
