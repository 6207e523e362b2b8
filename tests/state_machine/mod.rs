mod actions;
mod concurrency;
mod ticket_transitions;
