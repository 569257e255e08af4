pub mod threaded_window_scheduler;
