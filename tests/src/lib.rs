#![cfg(test)]

mod dispatcher;
mod probes;
