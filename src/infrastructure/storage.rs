pub mod http_image_store;
