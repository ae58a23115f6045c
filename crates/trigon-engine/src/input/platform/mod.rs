mod winit;

pub(crate) use self::winit::translate_key_event;
