pub mod a025_input_transaction;
