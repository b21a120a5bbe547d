#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSize {
    pub width: f32,
    pub height: f32,
}

impl ViewportSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Desktop,
    Mobile,
}

impl DeviceClass {
    pub fn is_mobile(self) -> bool {
        self == Self::Mobile
    }
}

/// Mobile means a touch-capable device narrower than the breakpoint.
pub fn classify_device(touch_capable: bool, width: f32, breakpoint: f32) -> DeviceClass {
    if touch_capable && width < breakpoint {
        DeviceClass::Mobile
    } else {
        DeviceClass::Desktop
    }
}

#[derive(Debug, Clone)]
pub struct ViewportTracker {
    size: ViewportSize,
    touch_capable: bool,
    breakpoint: f32,
}

impl ViewportTracker {
    pub fn new(size: ViewportSize, touch_capable: bool, breakpoint: f32) -> Self {
        Self {
            size,
            touch_capable,
            breakpoint,
        }
    }

    /// Returns whether the dimensions actually changed.
    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        let next = ViewportSize::new(width.max(0.0), height.max(0.0));
        if next == self.size {
            return false;
        }
        self.size = next;
        true
    }

    pub fn size(&self) -> ViewportSize {
        self.size
    }

    pub fn device_class(&self) -> DeviceClass {
        classify_device(self.touch_capable, self.size.width, self.breakpoint)
    }
}
