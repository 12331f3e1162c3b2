mod escrow;
mod moves;
mod registrar;
mod settlement;
mod timeout;
