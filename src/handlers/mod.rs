pub mod maxeon;
