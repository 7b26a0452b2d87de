pub mod sifts;
