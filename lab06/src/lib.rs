#![no_std]

pub mod reflectance;
