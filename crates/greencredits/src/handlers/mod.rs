mod ws;

pub(crate) use ws::ws;
