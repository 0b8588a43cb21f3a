pub mod lazy_heap;
