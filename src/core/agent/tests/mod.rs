mod observe;
mod support;
