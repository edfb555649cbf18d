use std::ops::Range;

/// 按行翻页的窗口 `[offset, offset + limit)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: usize,
    pub limit: usize,
    pub total: usize,
}

impl PageWindow {
    /// 超出列表末尾的 offset 会被收回到 `max(0, total - limit)`
    pub fn new(total: usize, offset: usize, limit: usize) -> Self {
        let limit = limit.max(1);
        let offset = if offset < total {
            offset
        } else {
            total.saturating_sub(limit)
        };
        Self { offset, limit, total }
    }

    pub fn range(&self) -> Range<usize> {
        self.offset..(self.offset + self.limit).min(self.total)
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let range = self.range();
        let end = range.end.min(items.len());
        items.get(range.start..end).unwrap_or(&[])
    }

    pub fn has_prev(&self) -> bool {
        self.offset > 0
    }

    pub fn has_next(&self) -> bool {
        self.offset + self.limit < self.total
    }

    pub fn prev_offset(&self) -> usize {
        self.offset.saturating_sub(self.limit)
    }

    /// 已经是最后一页时返回 None
    pub fn next_offset(&self) -> Option<usize> {
        self.has_next().then_some(self.offset + self.limit)
    }
}

/// 按版本分组翻页，每页一个分组
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupPage {
    pub index: usize,
    pub count: usize,
}

impl GroupPage {
    /// 不存在的分组下标回退到 0
    pub fn new(count: usize, requested: usize) -> Self {
        let index = if requested < count { requested } else { 0 };
        Self { index, count }
    }

    pub fn has_prev(&self) -> bool {
        self.index > 0
    }

    pub fn has_next(&self) -> bool {
        self.index + 1 < self.count
    }

    pub fn prev(&self) -> Option<usize> {
        self.has_prev().then(|| self.index - 1)
    }

    pub fn next(&self) -> Option<usize> {
        self.has_next().then_some(self.index + 1)
    }
}
