mod listing;
mod step_service;
mod ticket_service;
