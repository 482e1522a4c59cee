pub mod renderer_image;
