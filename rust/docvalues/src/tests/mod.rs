pub mod data_generator;
pub mod segment_store;





#[cfg(test)]
mod skip_index;

#[cfg(test)]
mod sorted;
