pub(crate) mod text_format;
