pub mod phantoms;
